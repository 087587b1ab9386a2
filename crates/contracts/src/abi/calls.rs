use alloy_sol_types::sol;

sol! {
    #[derive(Debug)]
    function approve(address spender, uint256 value) external returns (bool);

    #[derive(Debug)]
    function balanceOf(address account) external view returns (uint256);

    #[derive(Debug)]
    function depositForBurn(
        uint256 amount,
        uint32 destinationDomain,
        bytes32 mintRecipient,
        address burnToken
    ) external returns (uint64 _nonce);

    #[derive(Debug)]
    function receiveMessage(bytes calldata message, bytes calldata attestation) external returns (bool success);
}
